/// The three mutually exclusive synchronization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// Every position is set straight from the newest snapshot.
    Naive,
    /// Local player simulated and reconciled; remote players interpolated.
    Predicted,
    /// Everyone, including the local player, rendered from the delayed timeline.
    InterpolationOnly,
}

impl SyncMode {
    /// Naive wins over prediction when both flags are set.
    pub fn select(naive_approach: bool, client_prediction: bool) -> Self {
        if naive_approach {
            Self::Naive
        } else if client_prediction {
            Self::Predicted
        } else {
            Self::InterpolationOnly
        }
    }

    pub fn buffers_snapshots(self) -> bool {
        !matches!(self, Self::Naive)
    }

    pub fn predicts_local(self) -> bool {
        matches!(self, Self::Predicted)
    }

    pub fn interpolates_local(self) -> bool {
        matches!(self, Self::InterpolationOnly)
    }
}
