mod tome;

pub use tome::TomeError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
