// Domain-layer modules and shared errors/models
pub mod models {
    pub use crate::models::*;
}

pub mod resolution {
    pub use crate::resolution::*;
}

pub mod ingestion {
    pub use crate::ingestion::*;
}

pub mod errors {
    pub use crate::errors::*;
}
