//! Recovery of user methods from compiler-generated state machines.
//!
//! The C# compiler rewrites an iterator or `async` method `Foo` into a nested type such as
//! `<Foo>d__3` whose `MoveNext` method holds the user's code, and leaves `Foo` as a stub that
//! creates the state machine. A breakpoint inside `Foo` therefore reports `MoveNext`.
//!
//! Recovery has two phases:
//!
//! 1. **Candidate** - the state-machine type's name is parsed as a generated name of kind
//!    [`crate::metadata::generatednames::GeneratedNameKind::StateMachineType`], yielding the
//!    source method name. Methods of that name on the enclosing type are candidates.
//! 2. **Proof** - a candidate is accepted only if its `AsyncStateMachineAttribute` or
//!    `IteratorStateMachineAttribute` names exactly this state-machine type.
//!
//! Without proof the step method is returned unchanged. Name matching alone is never trusted.

use tracing::{debug, warn};

use crate::{
    metadata::{
        customattributes::AttributeDescription,
        generatednames::{try_parse_source_method_name, GeneratedNameKind},
        module::LoadedModule,
        typesystem::{MethodSymbolRc, Symbol, TypeSymbolRc},
    },
    Error, Result,
};

/// Attributes consulted for the declared state-machine type, in order
const STATE_MACHINE_ATTRIBUTES: [AttributeDescription; 2] = [
    AttributeDescription::ASYNC_STATE_MACHINE,
    AttributeDescription::ITERATOR_STATE_MACHINE,
];

/// Outcome of origin recovery for one method.
///
/// Every variant carries the best available method symbol; callers that do not care how it
/// was obtained use [`MethodOrigin::into_method`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOrigin {
    /// The method is not a state-machine step method and is its own origin
    Ordinary(MethodSymbolRc),
    /// The user method the step method was generated from, proven by attribute
    Recovered(MethodSymbolRc),
    /// The containing type looks like a state machine but no candidate could be proven;
    /// carries the input unchanged
    Unproven(MethodSymbolRc),
    /// More than one candidate was proven; carries the first in declaration order
    Ambiguous {
        /// The first proven candidate
        method: MethodSymbolRc,
        /// Number of proven candidates
        matches: usize,
    },
}

impl MethodOrigin {
    /// The method this outcome resolves to
    #[must_use]
    pub fn method(&self) -> &MethodSymbolRc {
        match self {
            MethodOrigin::Ordinary(method)
            | MethodOrigin::Recovered(method)
            | MethodOrigin::Unproven(method)
            | MethodOrigin::Ambiguous { method, .. } => method,
        }
    }

    /// Consumes the outcome, returning the method it resolves to
    #[must_use]
    pub fn into_method(self) -> MethodSymbolRc {
        match self {
            MethodOrigin::Ordinary(method)
            | MethodOrigin::Recovered(method)
            | MethodOrigin::Unproven(method)
            | MethodOrigin::Ambiguous { method, .. } => method,
        }
    }

    /// Returns true if a user method was recovered from a step method
    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(
            self,
            MethodOrigin::Recovered(_) | MethodOrigin::Ambiguous { .. }
        )
    }
}

/// Recovers the user method `method` was generated from.
///
/// # Errors
/// Returns [`Error::ModuleMismatch`] if `method` was not decoded from `module`. Every other
/// failure along the way folds into [`MethodOrigin::Unproven`].
pub fn resolve_origin(module: &LoadedModule, method: &MethodSymbolRc) -> Result<MethodOrigin> {
    if let Some(actual) = method.origin.module() {
        if actual != module.id() {
            return Err(Error::ModuleMismatch {
                expected: module.id(),
                actual,
            });
        }
    }

    let state_machine = &method.containing_type;
    let Some(source_name) = try_parse_source_method_name(
        &state_machine.name,
        Some(GeneratedNameKind::StateMachineType),
    ) else {
        return Ok(MethodOrigin::Ordinary(method.clone()));
    };

    let Some(outer) = state_machine.containing_type() else {
        debug!(state_machine = %state_machine, "state machine type is not nested");
        return Ok(MethodOrigin::Unproven(method.clone()));
    };

    let candidates = match module.members(outer, &source_name) {
        Ok(candidates) => candidates,
        Err(e) => {
            debug!(outer = %outer, error = %e, "failed to enumerate candidate methods");
            return Ok(MethodOrigin::Unproven(method.clone()));
        }
    };

    let state_machine = state_machine.original_definition();
    let proven: Vec<MethodSymbolRc> = candidates
        .into_iter()
        .filter_map(|candidate| match candidate {
            Symbol::Method(candidate) => Some(candidate),
            Symbol::Type(_) => None,
        })
        .filter(|candidate| declares_state_machine(module, candidate, &state_machine))
        .collect();

    let mut proven = proven.into_iter();
    match (proven.next(), proven.len()) {
        (None, _) => {
            debug!(
                method = %method,
                source_name = %source_name,
                "no candidate declares the state machine"
            );
            Ok(MethodOrigin::Unproven(method.clone()))
        }
        (Some(origin), 0) => Ok(MethodOrigin::Recovered(origin)),
        (Some(origin), rest) => {
            warn!(
                method = %method,
                origin = %origin,
                matches = rest + 1,
                "several methods declare the same state machine, using the first"
            );
            Ok(MethodOrigin::Ambiguous {
                method: origin,
                matches: rest + 1,
            })
        }
    }
}

/// Returns `method` unless it is a state-machine step method whose user method can be proven.
///
/// # Errors
/// Returns [`Error::ModuleMismatch`] if `method` was not decoded from `module`.
pub fn original_method(module: &LoadedModule, method: &MethodSymbolRc) -> Result<MethodSymbolRc> {
    resolve_origin(module, method).map(MethodOrigin::into_method)
}

/// Whether `candidate` carries a state-machine attribute naming `state_machine`
fn declares_state_machine(
    module: &LoadedModule,
    candidate: &MethodSymbolRc,
    state_machine: &TypeSymbolRc,
) -> bool {
    let declared = STATE_MACHINE_ATTRIBUTES.iter().find_map(|description| {
        match module.string_valued_attribute(candidate, *description) {
            Ok(Some(name)) => Some(name),
            Ok(None) => None,
            Err(e) => {
                debug!(
                    candidate = %candidate,
                    attribute = description.name,
                    error = %e,
                    "undecodable attribute"
                );
                None
            }
        }
    });

    let Some(declared) = declared else {
        return false;
    };

    match module.type_for_serialized_name(&declared) {
        Ok(ty) => ty.original_definition() == *state_machine,
        Err(e) => {
            debug!(
                candidate = %candidate,
                declared = %declared,
                error = %e,
                "declared state machine does not resolve"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        evaluation::options::MetadataImportOptions,
        metadata::{
            image::{MetadataImage, MetadataImageBuilder},
            tables::TypeAttributes,
        },
        test::{
            iterator_module, IteratorModule, COMPILER_SERVICES, DEMO_MVID, ITERATOR_STATE_MACHINE,
            OTHER_MVID,
        },
    };

    fn load(image: MetadataImage) -> LoadedModule {
        LoadedModule::new(Arc::new(image), MetadataImportOptions::All).unwrap()
    }

    #[test]
    fn recovers_iterator_method() {
        let IteratorModule {
            image,
            foo,
            move_next,
            ..
        } = iterator_module();
        let module = load(image);

        let step = module.resolve_method(move_next).unwrap();
        let origin = resolve_origin(&module, &step).unwrap();

        assert!(origin.is_recovered());
        assert!(matches!(origin, MethodOrigin::Recovered(_)));
        assert_eq!(origin.method().origin.token(), Some(foo));
    }

    #[test]
    fn ordinary_methods_are_unchanged() {
        let IteratorModule { image, foo, .. } = iterator_module();
        let module = load(image);

        let method = module.resolve_method(foo).unwrap();
        let origin = resolve_origin(&module, &method).unwrap();

        assert!(matches!(origin, MethodOrigin::Ordinary(_)));
        assert!(Arc::ptr_eq(&original_method(&module, &method).unwrap(), &method));
    }

    #[test]
    fn recovers_async_method_with_dotted_name() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", DEMO_MVID);
        builder.assembly("Demo");
        let service = builder.add_type("Demo", "Service", TypeAttributes::PUBLIC);
        let run = builder.add_method("Demo.IRunner.RunAsync", 0x01E1).unwrap();
        builder
            .add_nested_type(
                service,
                "<Demo-IRunner-RunAsync>d__0",
                TypeAttributes::NESTED_PRIVATE | TypeAttributes::SEALED,
            )
            .unwrap();
        let move_next = builder.add_method("MoveNext", 0x01E1).unwrap();
        builder
            .add_string_attribute(
                run,
                COMPILER_SERVICES,
                "AsyncStateMachineAttribute",
                Some("Demo.Service+<Demo-IRunner-RunAsync>d__0"),
            )
            .unwrap();
        let module = load(builder.build());

        let step = module.resolve_method(move_next).unwrap();
        let origin = original_method(&module, &step).unwrap();
        assert_eq!(origin.origin.token(), Some(run));
    }

    #[test]
    fn rejects_unproven_candidates() {
        // <Bar>d__1 exists, Bar exists, but Bar's attribute names another state machine
        let mut builder = MetadataImageBuilder::new("Demo.dll", DEMO_MVID);
        builder.assembly("Demo");
        let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
        let bar = builder.add_method("Bar", 0x0096).unwrap();
        builder
            .add_nested_type(program, "<Bar>d__1", TypeAttributes::NESTED_PRIVATE)
            .unwrap();
        let move_next = builder.add_method("MoveNext", 0x01E1).unwrap();
        builder
            .add_nested_type(program, "<Bar>d__2", TypeAttributes::NESTED_PRIVATE)
            .unwrap();
        builder
            .add_string_attribute(
                bar,
                COMPILER_SERVICES,
                ITERATOR_STATE_MACHINE,
                Some("Demo.Program+<Bar>d__2"),
            )
            .unwrap();
        let module = load(builder.build());

        let step = module.resolve_method(move_next).unwrap();
        let origin = resolve_origin(&module, &step).unwrap();

        assert!(matches!(origin, MethodOrigin::Unproven(_)));
        assert!(!origin.is_recovered());
        assert!(Arc::ptr_eq(origin.method(), &step));
    }

    #[test]
    fn rejects_missing_and_damaged_attributes() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", DEMO_MVID);
        builder.assembly("Demo");
        let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
        builder.add_method("Baz", 0x0096).unwrap();
        let damaged = builder.add_method("Baz", 0x0096).unwrap();
        let unresolvable = builder.add_method("Baz", 0x0096).unwrap();
        builder
            .add_nested_type(program, "<Baz>d__0", TypeAttributes::NESTED_PRIVATE)
            .unwrap();
        let move_next = builder.add_method("MoveNext", 0x01E1).unwrap();
        builder.add_attribute_blob(
            damaged,
            COMPILER_SERVICES,
            ITERATOR_STATE_MACHINE,
            vec![0x01, 0x00, 0x40],
        );
        builder
            .add_string_attribute(
                unresolvable,
                COMPILER_SERVICES,
                ITERATOR_STATE_MACHINE,
                Some("Demo.Program+<Baz>d__0, OtherAssembly"),
            )
            .unwrap();
        let module = load(builder.build());

        let step = module.resolve_method(move_next).unwrap();
        assert!(matches!(
            resolve_origin(&module, &step).unwrap(),
            MethodOrigin::Unproven(_)
        ));
    }

    #[test]
    fn top_level_state_machine_is_unproven() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", DEMO_MVID);
        builder.add_type("Demo", "<Foo>d__0", TypeAttributes::NOT_PUBLIC);
        let move_next = builder.add_method("MoveNext", 0x01E1).unwrap();
        let module = load(builder.build());

        let step = module.resolve_method(move_next).unwrap();
        assert!(matches!(
            resolve_origin(&module, &step).unwrap(),
            MethodOrigin::Unproven(_)
        ));
    }

    #[test]
    fn ambiguous_candidates_pick_first() {
        let mut builder = MetadataImageBuilder::new("Demo.dll", DEMO_MVID);
        builder.assembly("Demo");
        let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
        let first = builder.add_method("Foo", 0x0096).unwrap();
        let second = builder.add_method("Foo", 0x0096).unwrap();
        builder
            .add_nested_type(program, "<Foo>d__0", TypeAttributes::NESTED_PRIVATE)
            .unwrap();
        let move_next = builder.add_method("MoveNext", 0x01E1).unwrap();
        for method in [first, second] {
            builder
                .add_string_attribute(
                    method,
                    COMPILER_SERVICES,
                    ITERATOR_STATE_MACHINE,
                    Some("Demo.Program+<Foo>d__0"),
                )
                .unwrap();
        }
        let module = load(builder.build());

        let step = module.resolve_method(move_next).unwrap();
        match resolve_origin(&module, &step).unwrap() {
            MethodOrigin::Ambiguous { method, matches } => {
                assert_eq!(method.origin.token(), Some(first));
                assert_eq!(matches, 2);
            }
            other => panic!("expected an ambiguous origin, got {other:?}"),
        }
    }

    #[test]
    fn foreign_method_is_rejected() {
        let IteratorModule {
            image, move_next, ..
        } = iterator_module();
        let module = load(image);
        let step = module.resolve_method(move_next).unwrap();

        let mut other = MetadataImageBuilder::new("Other.dll", OTHER_MVID);
        other.assembly("Other");
        let other = load(other.build());

        assert!(matches!(
            resolve_origin(&other, &step),
            Err(Error::ModuleMismatch { .. })
        ));
    }
}
