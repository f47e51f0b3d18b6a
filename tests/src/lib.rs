//! End-to-end tests of a full inventory run against in-memory adapters.

#[cfg(test)]
mod fakes;
#[cfg(test)]
mod inventory;
