/// Telegram accepts at most 10 items in one media group
pub const MAX_MEDIA_GROUP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub url: String,
    pub caption: Option<String>,
}

/// One media-group send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryBatch {
    pub items: Vec<MediaItem>,
}

impl DeliveryBatch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split resolved URLs into media groups, preserving order.
/// Only the very first item carries `caption`; empty input yields no batches.
pub fn into_batches(urls: Vec<String>, caption: &str) -> Vec<DeliveryBatch> {
    let mut batches: Vec<DeliveryBatch> = Vec::with_capacity(urls.len().div_ceil(MAX_MEDIA_GROUP));

    for (i, url) in urls.into_iter().enumerate() {
        let item = MediaItem {
            url,
            caption: (i == 0).then(|| caption.to_string()),
        };
        match batches.last_mut() {
            Some(batch) if batch.len() < MAX_MEDIA_GROUP => batch.items.push(item),
            _ => batches.push(DeliveryBatch { items: vec![item] }),
        }
    }

    batches
}
