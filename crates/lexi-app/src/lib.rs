pub mod client;
pub mod controller;
pub mod events;
pub mod io;
pub mod list;
pub mod page;
pub mod profile;
pub mod state;

#[cfg(test)]
mod tests;
