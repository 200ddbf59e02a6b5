//! User-facing strings.

pub const SCHEDULE_BUTTON: &str = "📆 Расписание 2 корпуса";
pub const VIEW_LOGS_BUTTON: &str = "📄 Посмотреть логи";
pub const VIEW_REGISTRY_BUTTON: &str = "🗄️ Посмотреть БД";

pub const ADMIN_WELCOME: &str = "🛠 Время поработать!";
pub const USER_WELCOME: &str =
    "Привет! 👋\nВоспользуйся кнопкой ниже, чтобы получить расписание для 2-го корпуса.";
pub const ACCESS_DENIED: &str = "У вас нет доступа к этой команде ✋";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда.\nИспользуй кнопку ниже или /schedule ✉️";

pub const SCHEDULE_LOAD_FAILED: &str = "Не удалось загрузить расписание. Попробуйте позже.";
pub const SCHEDULE_NOT_FOUND: &str = "Изображения для 2-го корпуса не найдены.";
pub const SCHEDULE_CAPTION: &str = "📅 Вот расписание для 2-го корпуса";

pub const LOG_DOCUMENT_CAPTION: &str = "📄 Файл с логами приложения";
pub const LOG_READ_FAILED: &str = "Ошибка чтения файла логов ❌";
pub const LOG_SEND_FAILED: &str = "Ошибка отправки файла логов ❌";

pub const REGISTRY_FAILED: &str = "Ошибка запроса к БД ❌";
pub const REGISTRY_HEADER: &str = "🗄️ Список пользователей:\n\n";
pub const REGISTRY_EMPTY: &str = "База данных пользователей пуста.";
