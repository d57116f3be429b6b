/// Position of a layer within a [`Network`](crate::Network).
///
/// The display form is the tag used in exported network files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::FromStr,
)]
pub enum Layer {
    #[display("input")]
    Input,
    #[display("hidden")]
    Hidden,
    #[display("output")]
    Output,
}

impl Layer {
    pub const ALL: [Self; 3] = [Self::Input, Self::Hidden, Self::Output];

    /// Number of neurons in this layer.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Input => 10,
            Self::Hidden | Self::Output => 9,
        }
    }

    /// Number of inputs each neuron of this layer consumes.
    #[must_use]
    pub const fn input_arity(self) -> usize {
        match self {
            Self::Input | Self::Hidden => 10,
            Self::Output => 9,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Input => 0,
            Self::Hidden => 1,
            Self::Output => 2,
        }
    }
}
