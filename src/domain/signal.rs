//! Discrete per-bar trading signal.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Signal {
    Long,
    #[default]
    Flat,
    Short,
}

impl Signal {
    /// Position direction: +1 long, 0 flat, -1 short.
    pub fn direction(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Flat => 0,
            Signal::Short => -1,
        }
    }

    pub fn as_f64(self) -> f64 {
        self.direction() as f64
    }
}
