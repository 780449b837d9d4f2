use varlink::idl::{parse_interface, Field, Interface, Member, Type, TypeAlias};

const SERVICE: &str = r#"# The Varlink Service Interface is provided by every varlink service. It
# describes the service and the interfaces it implements.
interface org.varlink.service

# Get a list of all the interfaces a service provides and information
# about the implementation.
method GetInfo() -> (
  vendor: string,
  product: string,
  version: string,
  url: string,
  interfaces: string[]
)

# Get the description of an interface that is implemented by this service.
method GetInterfaceDescription(interface: string) -> (description: string)

# The requested interface was not found.
error InterfaceNotFound (interface: string)

# The requested method was not found
error MethodNotFound (method: string)

# The interface defines the requested method, but the service does not
# implement it.
error MethodNotImplemented (method: string)

# One of the passed parameters is invalid.
error InvalidParameter (parameter: string)
"#;

const CERTIFICATION: &str = r#"# Interface to test varlink implementations against.
interface org.varlink.certification

type Interface (
  foo: (
    anon: (foo: bool, bar: bool)
  )[],
  bar: MyType
)

type MyType (
  object: string,
  enum: string,
  struct: (first: int, second: string),
  array: string[],
  dictionary: string[],
  stringset: string[],
  nullable: string,
  nullable_array_struct: (first: int, second: string)[],
  interface: Interface
)

method Start() -> (client_id: string)

method Test01(client_id: string) -> (bool: bool)

method Test02(client_id: string, bool: bool) -> (int: int)

method Test03(client_id: string, int: int) -> (float: float)

method Test11(client_id: string, last_more_replies: string[]) -> ()

method End(client_id: string) -> (all_ok: bool)

error ClientIdError ()

error CertificationError (wants: string, got: string)
"#;

fn roundtrip(src: &str) -> Interface {
    let interface = parse_interface(src).expect("parse");
    let rendered = interface.to_string();
    let reparsed = parse_interface(&rendered)
        .unwrap_or_else(|_| panic!("rendered text does not parse:\n{rendered}"));
    assert_eq!(reparsed, interface);
    // Canonical text is a fixed point.
    assert_eq!(reparsed.to_string(), rendered);
    interface
}

#[test]
fn roundtrip_service_interface() {
    let interface = roundtrip(SERVICE);
    assert_eq!(interface.name(), "org.varlink.service");
    assert_eq!(interface.methods().count(), 2);
    assert_eq!(interface.errors().count(), 4);
    assert!(interface
        .description()
        .starts_with("The Varlink Service Interface"));

    let info = interface.method("GetInfo").expect("GetInfo");
    let Type::Struct(fields) = &info.output else {
        panic!("GetInfo output is not a struct");
    };
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[4], Field::new("interfaces", Type::array(Type::String)));
}

#[test]
fn roundtrip_certification_interface() {
    let interface = roundtrip(CERTIFICATION);

    let names: Vec<&str> = interface.members().iter().map(Member::name).collect();
    assert_eq!(
        names,
        [
            "Interface",
            "MyType",
            "Start",
            "Test01",
            "Test02",
            "Test03",
            "Test11",
            "End",
            "ClientIdError",
            "CertificationError",
        ]
    );

    // Keywords are valid field names.
    let my_type = interface.alias("MyType").expect("MyType");
    let Type::Struct(fields) = &my_type.ty else {
        panic!("MyType is not a struct");
    };
    assert_eq!(fields[1].name, "enum");
    assert_eq!(fields[8].ty, Type::alias("Interface"));

    assert_eq!(
        interface.error("ClientIdError").expect("error").payload,
        Some(Type::Struct(Vec::new()))
    );
}

#[test]
fn roundtrip_constructed_interface() {
    let mut interface = Interface::new("org.example.built").expect("name");
    interface.set_description("Built by hand\n\nwith a blank line");
    interface.add_member(TypeAlias {
        name: "Empty".into(),
        description: String::new(),
        ty: Type::Struct(Vec::new()),
    });
    interface.add_member(TypeAlias {
        name: "Grid".into(),
        description: "Rows of cells".into(),
        ty: Type::array(Type::Struct(vec![Field::new(
            "cells",
            Type::array(Type::alias("Empty")),
        )])),
    });

    let reparsed = parse_interface(&interface.to_string()).expect("reparse");
    assert_eq!(reparsed, interface);
    assert_eq!(reparsed.description(), "Built by hand\n\nwith a blank line");
}

#[test]
fn reject_malformed_descriptions() {
    let cases = [
        "interface a",
        "interface a.b-",
        "interface org.example.test\ntype Matrix string[][]",
        "interface org.example.test\nmethod Get() => ()",
        "interface org.example.test\ntype T (a: int",
        "interface org.example.test\nconst X int",
    ];

    for src in cases {
        assert!(parse_interface(src).is_err(), "accepted: {src:?}");
    }
}
