pub mod arena;

pub use arena::ArenaConfig;
