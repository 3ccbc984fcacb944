// src/models/mod.rs
pub mod brownian;
pub mod model;
pub mod ou_process;

pub use brownian::{sde_bm, BrownianMotion};
pub use model::ExactProcess;
pub use ou_process::{sde_ou, OuProcess};
