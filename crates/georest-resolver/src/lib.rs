//! Two-tier geo resolution for georest.
//!
//! Addresses, coordinates and region boundaries are looked up in a cache
//! first and fetched from an external provider on a miss. Fetched values are
//! written back to the cache; a failed write-back is logged and never fails
//! the resolve.

pub mod address;
pub mod error;
pub mod geocoder;
pub mod http;
pub mod memory;
pub mod nominatim;
pub mod region;
pub mod retry;
pub mod tier;

pub use address::{AddressKey, AddressResolver, GeocodingProvider, ResolvedAddress};
pub use error::ResolveError;
pub use geocoder::GoogleGeocoder;
pub use http::HttpSettings;
pub use memory::{MemoryAddressCache, MemoryCacheStore};
pub use nominatim::NominatimClient;
pub use region::{RegionProvider, RegionResolver};
pub use tier::{CacheStore, Fallback, TwoTierResolver};
