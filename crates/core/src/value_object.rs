//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two instances
/// with the same attributes are the same value. `AcademicCycle { 2026, 1 }`
/// is a value object; a `Student` with an id is an entity.
///
/// To "modify" a value object, create a new one. This keeps values safe to
/// share across threads and predictable to reason about.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
