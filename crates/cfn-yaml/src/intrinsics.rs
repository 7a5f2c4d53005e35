//! Declarative registry of CloudFormation intrinsic functions.
//!
//! Short-form YAML tags (`!If`) and long-form names (`Fn::If`) name the same
//! function. Tagged nodes always store the long form; the emitter maps back
//! to the short tag.

/// Definition of an intrinsic function.
#[derive(Debug, PartialEq, Eq)]
pub struct IntrinsicDef {
    /// Short YAML tag without the leading `!`
    pub yaml_tag: &'static str,
    /// Long-form key used in JSON templates
    pub long_name: &'static str,
}

const fn def(yaml_tag: &'static str, long_name: &'static str) -> IntrinsicDef {
    IntrinsicDef {
        yaml_tag,
        long_name,
    }
}

/// All intrinsics with a YAML short form.
pub static INTRINSICS: &[IntrinsicDef] = &[
    def("Ref", "Ref"),
    def("Condition", "Condition"),
    def("Base64", "Fn::Base64"),
    def("Cidr", "Fn::Cidr"),
    def("FindInMap", "Fn::FindInMap"),
    def("ForEach", "Fn::ForEach"),
    def("GetAtt", "Fn::GetAtt"),
    def("GetAZs", "Fn::GetAZs"),
    def("ImportValue", "Fn::ImportValue"),
    def("Join", "Fn::Join"),
    def("Length", "Fn::Length"),
    def("Select", "Fn::Select"),
    def("Split", "Fn::Split"),
    def("Sub", "Fn::Sub"),
    def("ToJsonString", "Fn::ToJsonString"),
    def("Transform", "Fn::Transform"),
    def("And", "Fn::And"),
    def("Equals", "Fn::Equals"),
    def("If", "Fn::If"),
    def("Not", "Fn::Not"),
    def("Or", "Fn::Or"),
];

/// Look up an intrinsic by its short YAML tag.
pub fn lookup_by_tag(tag: &str) -> Option<&'static IntrinsicDef> {
    INTRINSICS.iter().find(|i| i.yaml_tag == tag)
}

/// Look up an intrinsic by its long-form name.
pub fn lookup_by_name(name: &str) -> Option<&'static IntrinsicDef> {
    INTRINSICS.iter().find(|i| i.long_name == name)
}

/// Long-form name for a short tag. Unknown tags are returned unchanged.
pub fn long_name(tag: &str) -> String {
    match lookup_by_tag(tag) {
        Some(def) => def.long_name.to_string(),
        None => tag.to_string(),
    }
}

/// Short tag for a long-form name. Unknown names are returned unchanged.
pub fn short_tag(name: &str) -> &str {
    match lookup_by_name(name) {
        Some(def) => def.yaml_tag,
        None => name,
    }
}
