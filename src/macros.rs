#[macro_export]
macro_rules! impl_string_newtype {
    ($name:ty) => {
        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }
    };
}
