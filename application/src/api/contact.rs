//! Contact information scalars shared by `Client`s and `User`s.

use derive_more::{AsRef, Display, From, Into};
use juniper::GraphQLScalar;
use service::domain;

use crate::api::scalar;

/// Email address.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Email", with = scalar::Via::<domain::contact::Email>)]
pub struct Email(domain::contact::Email);

/// Phone number.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Phone", with = scalar::Via::<domain::contact::Phone>)]
pub struct Phone(domain::contact::Phone);

/// Postal address.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Address", with = scalar::Via::<domain::contact::Address>)]
pub struct Address(domain::contact::Address);
