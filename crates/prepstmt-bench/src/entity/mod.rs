//! sea-orm entities for the ORM strategy.

pub mod record;
