mod array;
mod dictionary;
mod graph;
mod primitive;
mod stream;

pub use array::Array;
pub use dictionary::Dictionary;
pub use graph::ObjectGraph;
pub use primitive::{Object, ObjectId};
pub use stream::Stream;
