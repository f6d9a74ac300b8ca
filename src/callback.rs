use core::fmt;

/// Nullable event callback taking the event's integer argument.
///
/// Any captured state lives behind the borrowed closure, so the wrapper stays `Copy` and the
/// table never allocates. An empty callback is a no-op when invoked.
#[derive(Copy, Clone, Default)]
pub struct Callback<'a>(Option<&'a (dyn Fn(i32) + Sync)>);

impl<'a> Callback<'a> {
    pub const EMPTY: Self = Self(None);

    #[inline]
    pub const fn new(f: &'a (dyn Fn(i32) + Sync)) -> Self {
        Self(Some(f))
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Invoke with `arg`. Returns true if a callable was present.
    #[inline]
    pub fn call(&self, arg: i32) -> bool {
        match self.0 {
            Some(f) => {
                f(arg);
                true
            }
            None => false,
        }
    }
}

impl<'a, F: Fn(i32) + Sync> From<&'a F> for Callback<'a> {
    fn from(f: &'a F) -> Self {
        Self(Some(f))
    }
}

impl fmt::Debug for Callback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_empty() { "Callback(empty)" } else { "Callback(..)" })
    }
}
