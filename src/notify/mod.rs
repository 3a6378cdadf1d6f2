mod startup;
mod toasts;

pub use startup::StartupWarning;
pub use toasts::{DEFAULT_TOAST_DURATION, Toast, ToastKind, Toasts};
