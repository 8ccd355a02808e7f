//! Marker types describing what a typed date or time stands for.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing the last modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing an expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing a deadline something is due by.
#[derive(Clone, Copy, Debug)]
pub struct Due;

/// Marker type describing a payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// Marker type describing a dispatch to a recipient.
#[derive(Clone, Copy, Debug)]
pub struct Sending;

/// Marker type describing a completion.
#[derive(Clone, Copy, Debug)]
pub struct Completion;
