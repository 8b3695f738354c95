use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Globally identifies a resource that is not local to a single dataplane, e.g. a mesh service
/// or an externally defined service.
///
/// The canonical form is `kri_<type>_<mesh>_<zone>_<namespace>_<name>_<section>`, where any
/// segment other than the type may be empty. Segments must not contain `_`: an identifier with
/// such a segment still displays, but its string form no longer parses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub resource_type: ResourceType,
    pub mesh: String,
    pub zone: String,
    pub namespace: String,
    pub name: String,
    pub section_name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Mesh,
    MeshService,
    MeshExternalService,
    MeshMultiZoneService,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseResourceIdError {
    #[error("missing 'kri' prefix")]
    MissingPrefix,

    #[error("expected 7 '_'-separated segments, got {0}")]
    SegmentCount(usize),

    #[error("unknown resource type {0:?}")]
    UnknownType(String),
}

const PREFIX: &str = "kri";

// === impl ResourceType ===

impl ResourceType {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Mesh => "m",
            Self::MeshService => "msvc",
            Self::MeshExternalService => "extsvc",
            Self::MeshMultiZoneService => "mzsvc",
        }
    }
}

impl FromStr for ResourceType {
    type Err = ParseResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Self::Mesh),
            "msvc" => Ok(Self::MeshService),
            "extsvc" => Ok(Self::MeshExternalService),
            "mzsvc" => Ok(Self::MeshMultiZoneService),
            s => Err(ParseResourceIdError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.short_name().fmt(f)
    }
}

// === impl ResourceId ===

impl ResourceId {
    pub fn new(resource_type: ResourceType, mesh: impl ToString, name: impl ToString) -> Self {
        Self {
            resource_type,
            mesh: mesh.to_string(),
            zone: String::new(),
            namespace: String::new(),
            name: name.to_string(),
            section_name: String::new(),
        }
    }

    /// Identifies a mesh.
    pub fn mesh(name: impl ToString) -> Self {
        let name = name.to_string();
        Self::new(ResourceType::Mesh, name.clone(), name)
    }

    pub fn with_zone(mut self, zone: impl ToString) -> Self {
        self.zone = zone.to_string();
        self
    }

    pub fn with_namespace(mut self, namespace: impl ToString) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn with_section(mut self, section: impl ToString) -> Self {
        self.section_name = section.to_string();
        self
    }

    /// Returns the identifier of the whole resource, without any section (e.g. port) scoping.
    pub fn without_section(&self) -> Self {
        Self {
            section_name: String::new(),
            ..self.clone()
        }
    }

    pub fn has_section(&self) -> bool {
        !self.section_name.is_empty()
    }

    pub fn is_mesh_external_service(&self) -> bool {
        self.resource_type == ResourceType::MeshExternalService
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}_{}_{}",
            PREFIX,
            self.resource_type,
            self.mesh,
            self.zone,
            self.namespace,
            self.name,
            self.section_name
        )
    }
}

impl FromStr for ResourceId {
    type Err = ParseResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split('_').collect::<Vec<_>>();
        if parts.first() != Some(&PREFIX) {
            return Err(ParseResourceIdError::MissingPrefix);
        }
        match parts.as_slice() {
            [_, ty, mesh, zone, namespace, name, section] => Ok(Self {
                resource_type: ty.parse()?,
                mesh: mesh.to_string(),
                zone: zone.to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                section_name: section.to_string(),
            }),
            parts => Err(ParseResourceIdError::SegmentCount(parts.len())),
        }
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = ResourceId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a resource identifier in kri_<type>_<mesh>_<zone>_<namespace>_<name>_<section> format")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}
