pub mod seir;
pub mod seirsvbh;
