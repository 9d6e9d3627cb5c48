pub mod columns;
pub mod models;
pub mod normalizer;
pub mod paginator;

pub use columns::{resolve_columns, ColumnSchema, RateComponent, SchemaKey};
pub use models::{
    CanonicalComparatif, ElectricityComparatif, EnergyDetails, EnergyType, GasComparatif,
    ProviderRateRecord, RawComparatifInput, SavingsIndicators, SupplierKind,
};
pub use normalizer::{normalize, NormalizeOptions};
pub use paginator::{paginate, DisplayPage, PlacedRow, PAGE_CAPACITY};
