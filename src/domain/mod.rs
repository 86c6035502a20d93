// Domain layer - Pure models and geo math, no I/O
pub mod candidate;
pub mod gate;
pub mod layout;
pub mod position;
