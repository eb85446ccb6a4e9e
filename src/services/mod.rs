// Service facades
// One thin wrapper per web service; each method maps its arguments onto an endpoint

mod cloudlib;
mod ecom;
mod identity;
mod license;

pub use cloudlib::CloudLib;
pub use ecom::Ecom;
pub use identity::Identity;
pub use license::License;
