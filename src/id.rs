//! Non-owning handles into pools owned by the scene graph and the batcher.

use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

handle!(
    /// A texture owned by the texture manager.
    TextureId
);
handle!(
    /// A drawable owned by the scene graph.
    RenderableId
);
handle!(
    /// A batcher instance, named by [`BatchDescriptor::batcher_name`](crate::BatchDescriptor).
    BatcherId
);
handle!(
    /// A batch currently being filled by a batcher.
    BatchId
);
