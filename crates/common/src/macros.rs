/// Creates an info-level span and enters it.
///
/// ```ignore
/// let _s = common::span!("decode");
/// ```
#[macro_export]
macro_rules! span {
    ($name:literal) => {
        tracing::info_span!($name).entered()
    };
}
