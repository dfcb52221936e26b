//! # Vocabulary IRIs
//!
//! Well-known IRIs the core reads from JSON-LD documents and shape graphs.
//! Everything here is compiled in and immutable at runtime.

/// Fairspace ontology namespace.
pub const FS_NS: &str = "http://fairspace.io/ontology#";

/// SHACL namespace.
pub const SHACL_NS: &str = "http://www.w3.org/ns/shacl#";

// =============================================================================
// RDF / RDFS / XSD
// =============================================================================

/// rdf:type, the predicate an entity's class is asserted with.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// rdfs:label
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// rdfs:comment
pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

/// xsd:string
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

// =============================================================================
// SHACL
// =============================================================================

/// sh:NodeShape
pub const SHACL_NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";

/// sh:PropertyShape
pub const SHACL_PROPERTY_SHAPE: &str = "http://www.w3.org/ns/shacl#PropertyShape";

/// sh:targetClass
pub const SHACL_TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";

/// sh:property
pub const SHACL_PROPERTY: &str = "http://www.w3.org/ns/shacl#property";

/// sh:path
pub const SHACL_PATH: &str = "http://www.w3.org/ns/shacl#path";

/// sh:name
pub const SHACL_NAME: &str = "http://www.w3.org/ns/shacl#name";

/// sh:description
pub const SHACL_DESCRIPTION: &str = "http://www.w3.org/ns/shacl#description";

/// sh:datatype
pub const SHACL_DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";

/// sh:class
pub const SHACL_CLASS: &str = "http://www.w3.org/ns/shacl#class";

/// sh:minCount
pub const SHACL_MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";

/// sh:maxCount
pub const SHACL_MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";

/// sh:maxLength
pub const SHACL_MAX_LENGTH: &str = "http://www.w3.org/ns/shacl#maxLength";

// =============================================================================
// FAIRSPACE EXTENSIONS
// =============================================================================

/// Infix used when minting subject IRIs for new instances of a class.
pub const FS_CLASS_INFIX: &str = "http://fairspace.io/ontology#classInfix";

/// Marks a class or property as maintained by the system only.
pub const FS_MACHINE_ONLY: &str = "http://fairspace.io/ontology#machineOnly";

/// Marks a string property as rendered with a multi-line editor.
pub const FS_MULTILINE: &str = "http://fairspace.io/ontology#textArea";

/// Infix used when a class declares none.
pub const DEFAULT_CLASS_INFIX: &str = "generic";

/// Path segment between origin and infix in minted subject IRIs.
pub const IRI_PATH_SEGMENT: &str = "iri";
