pub mod clearcity;
pub mod setcity;
#[allow(clippy::module_inception)]
pub mod weather;
