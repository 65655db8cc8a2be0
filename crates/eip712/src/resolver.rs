//! Type signatures and type hashes.

use std::collections::BTreeMap;

use eip712_common::keccak_256;

use crate::{Error, Registry, TypeDescriptor};

/// Build the canonical type signature of the `descriptor`.
///
/// The signature of the type itself goes first, followed by the signatures of all the
/// transitively referenced types, each exactly once and sorted by name.
pub fn encode_type(descriptor: &TypeDescriptor, registry: &Registry) -> Result<String, Error> {
    let mut dependencies = BTreeMap::new();
    let mut path = Vec::new();
    collect_dependencies(descriptor, registry, &mut path, &mut dependencies)?;

    let mut signature = descriptor.own_signature();
    for dependency in dependencies.values() {
        signature.push_str(&dependency.own_signature());
    }

    tracing::trace!(
        message = "encoded type",
        type_name = descriptor.name(),
        signature = %signature,
    );
    Ok(signature)
}

/// Compute the type hash: the keccak256 of the canonical type signature.
pub fn type_hash(descriptor: &TypeDescriptor, registry: &Registry) -> Result<[u8; 32], Error> {
    let signature = encode_type(descriptor, registry)?;
    Ok(keccak_256(signature.as_bytes()))
}

/// Walk the references of `current` depth-first, collecting the referenced types by name.
///
/// The `path` holds the names of the types currently being resolved; reaching one of them
/// again means the references form a cycle.
fn collect_dependencies<'r>(
    current: &TypeDescriptor,
    registry: &'r Registry,
    path: &mut Vec<String>,
    found: &mut BTreeMap<&'r str, &'r TypeDescriptor>,
) -> Result<(), Error> {
    path.push(current.name().to_owned());

    for referenced in current.referenced_types() {
        if path.iter().any(|on_path| on_path == referenced) {
            return Err(Error::CyclicTypeReference {
                type_name: referenced.to_owned(),
            });
        }

        let dependency = registry
            .get(referenced)
            .ok_or_else(|| Error::UnknownTypeReference {
                type_name: referenced.to_owned(),
                referenced_by: current.name().to_owned(),
            })?;

        if found.insert(dependency.name(), dependency).is_some() {
            continue;
        }
        collect_dependencies(dependency, registry, path, found)?;
    }

    path.pop();
    Ok(())
}
