//! External provider clients
//!
//! Knowledge sources: Wikidata (knowledge base), Wikipedia (encyclopedia),
//! Britannica (encyclopedia mirror). Geocoders: Nominatim, ArcGIS.
//!
//! Each client owns a rate-limited [`http::ProviderHttp`] and reports failures
//! as `LookupError`; none of them retries.

pub mod arcgis;
pub mod britannica;
pub mod http;
pub mod nominatim;
pub mod wikidata;
pub mod wikipedia;

pub use arcgis::ArcGisClient;
pub use britannica::BritannicaClient;
pub use http::ProviderHttp;
pub use nominatim::NominatimClient;
pub use wikidata::WikidataClient;
pub use wikipedia::WikipediaClient;
