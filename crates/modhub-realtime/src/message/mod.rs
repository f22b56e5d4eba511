//! Wire message schema, builders, (de)serialization, and validation.

pub mod builder;
pub mod serializer;
pub mod types;
pub mod validator;
