//! Shared fixtures for unit tests.

use crate::metadata::{
    identity::ModuleId,
    image::{MetadataImage, MetadataImageBuilder},
    tables::TypeAttributes,
    token::Token,
};

pub const DEMO_MVID: ModuleId = ModuleId::from_bytes([
    0x3F, 0x2A, 0x91, 0x5C, 0x0D, 0x44, 0x4B, 0x1E, 0x9A, 0x61, 0x7E, 0x22, 0xC8, 0x05, 0xB3, 0x10,
]);

pub const OTHER_MVID: ModuleId = ModuleId::from_bytes([
    0x8B, 0x01, 0x6D, 0xE7, 0x52, 0x3C, 0x47, 0xA0, 0xB5, 0x19, 0x2F, 0x90, 0x44, 0xDA, 0x6E, 0x03,
]);

pub const COMPILER_SERVICES: &str = "System.Runtime.CompilerServices";
pub const ITERATOR_STATE_MACHINE: &str = "IteratorStateMachineAttribute";

/// `Demo.dll`, the module a C# compiler emits for
///
/// ```csharp
/// namespace Demo {
///     public class Program {
///         public static IEnumerable<int> Foo() { yield return 1; }
///         private static void Foo(int unused) { }
///         ...
///     }
/// }
/// ```
///
/// with the iterator lowered into the nested `<Foo>d__3`.
pub struct IteratorModule {
    pub image: MetadataImage,
    pub program: Token,
    pub state_machine: Token,
    pub foo: Token,
    pub foo_overload: Token,
    pub move_next: Token,
}

// Helper function to create the iterator fixture, 12 MethodDef rows in total
pub fn iterator_module() -> IteratorModule {
    let mut builder = MetadataImageBuilder::new("Demo.dll", DEMO_MVID);
    builder.assembly("Demo");

    builder.add_type("", "<Module>", TypeAttributes::NOT_PUBLIC);

    let program = builder.add_type("Demo", "Program", TypeAttributes::PUBLIC);
    builder.add_method(".ctor", 0x1886).unwrap();
    builder.add_method("Main", 0x0096).unwrap();
    builder.add_method("Bar", 0x0086).unwrap();
    builder.add_method("<Main>b__0_0", 0x0093).unwrap();
    builder.add_method("get_Value", 0x0886).unwrap();
    builder.add_method("ToString", 0x00C6).unwrap();
    let foo = builder.add_method("Foo", 0x0096).unwrap();
    let foo_overload = builder.add_method("Foo", 0x0091).unwrap();

    let state_machine = builder
        .add_nested_type(
            program,
            "<Foo>d__3",
            TypeAttributes::NESTED_PRIVATE | TypeAttributes::SEALED,
        )
        .unwrap();
    builder.add_method(".ctor", 0x1886).unwrap();
    builder
        .add_method("System.IDisposable.Dispose", 0x01E1)
        .unwrap();
    builder
        .add_method("System.Collections.IEnumerator.get_Current", 0x09E1)
        .unwrap();
    let move_next = builder.add_method("MoveNext", 0x01E1).unwrap();

    builder
        .add_string_attribute(
            foo,
            COMPILER_SERVICES,
            ITERATOR_STATE_MACHINE,
            Some("Demo.Program+<Foo>d__3"),
        )
        .unwrap();

    IteratorModule {
        image: builder.build(),
        program,
        state_machine,
        foo,
        foo_overload,
        move_next,
    }
}
