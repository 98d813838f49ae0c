pub mod data;
pub mod seir;
pub mod seirsvbh;
