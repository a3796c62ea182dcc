//! Entry point description handed to the backend engine.

use std::fmt;

use serde::Serialize;

/// A JVM field/method type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Binary class name, e.g. `java.lang.String`
    Object(String),
    Array(Box<ValueType>),
}

impl ValueType {
    pub fn object(class_name: impl Into<String>) -> Self {
        Self::Object(class_name.into())
    }

    pub fn array_of(element: ValueType) -> Self {
        Self::Array(Box::new(element))
    }
}

impl fmt::Display for ValueType {
    /// Writes the type descriptor.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("V"),
            Self::Boolean => f.write_str("Z"),
            Self::Byte => f.write_str("B"),
            Self::Char => f.write_str("C"),
            Self::Short => f.write_str("S"),
            Self::Int => f.write_str("I"),
            Self::Long => f.write_str("J"),
            Self::Float => f.write_str("F"),
            Self::Double => f.write_str("D"),
            Self::Object(name) => write!(f, "L{};", name.replace('.', "/")),
            Self::Array(element) => write!(f, "[{element}"),
        }
    }
}

/// Fully qualified method identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReference {
    pub class_name: String,
    pub method_name: String,
    pub parameters: Vec<ValueType>,
    pub return_type: ValueType,
}

impl MethodReference {
    /// Method descriptor, e.g. `([Ljava/lang/String;)V`.
    pub fn descriptor(&self) -> String {
        let params: String = self.parameters.iter().map(ToString::to_string).collect();
        format!("({params}){}", self.return_type)
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class_name, self.method_name, self.descriptor())
    }
}

/// Argument synthesized by the engine when calling the entry method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayArgument {
    /// Argument slot
    pub index: usize,

    /// Element class of the zero-length array
    pub element_class: String,
}

/// The one method the generated module exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Name the method is exported under
    pub name: String,
    pub method: MethodReference,
    pub arguments: Vec<ArrayArgument>,
}

impl EntryPoint {
    /// `public static void main(String[])` of `class_name`, exported as
    /// `main` and called with an empty `String[]`.
    pub fn main(class_name: impl Into<String>) -> Self {
        Self {
            name: "main".to_string(),
            method: MethodReference {
                class_name: class_name.into(),
                method_name: "main".to_string(),
                parameters: vec![ValueType::array_of(ValueType::object("java.lang.String"))],
                return_type: ValueType::Void,
            },
            arguments: vec![ArrayArgument {
                index: 1,
                element_class: "java.lang.String".to_string(),
            }],
        }
    }

    pub fn class_name(&self) -> &str {
        &self.method.class_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_entry_point() {
        let entry = EntryPoint::main("Hello");

        assert_eq!(entry.name, "main");
        assert_eq!(entry.class_name(), "Hello");
        assert_eq!(entry.method.descriptor(), "([Ljava/lang/String;)V");
        assert_eq!(entry.method.to_string(), "Hello.main([Ljava/lang/String;)V");
        assert_eq!(
            entry.arguments,
            vec![ArrayArgument {
                index: 1,
                element_class: "java.lang.String".to_string()
            }]
        );
    }

    #[test]
    fn test_type_descriptors() {
        let cases = [
            (ValueType::Boolean, "Z"),
            (ValueType::Long, "J"),
            (ValueType::array_of(ValueType::Double), "[D"),
            (ValueType::object("java.util.List"), "Ljava/util/List;"),
            (
                ValueType::array_of(ValueType::array_of(ValueType::object("java.lang.Object"))),
                "[[Ljava/lang/Object;",
            ),
        ];
        for (value, descriptor) in cases {
            assert_eq!(value.to_string(), descriptor);
        }
    }
}
