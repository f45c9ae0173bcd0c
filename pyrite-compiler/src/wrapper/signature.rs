use pyrite_ast::{DataKind, DataType, Node};
use serde::{Deserialize, Serialize};

/// One argument or result of a native function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub dtype: DataType,
    #[serde(default)]
    pub rank: usize,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub keyword_only: bool,
    /// Function reference passed through as an opaque object
    #[serde(default)]
    pub is_callable: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            rank: 0,
            has_default: false,
            keyword_only: false,
            is_callable: false,
        }
    }

    /// Parameter typed after an already-typed node
    pub fn from_node(name: impl Into<String>, node: &Node<'_>) -> Self {
        Self {
            rank: node.rank(),
            ..Self::new(name, node.dtype())
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn keyword_only(mut self) -> Self {
        self.keyword_only = true;
        self
    }

    pub fn callable(mut self) -> Self {
        self.is_callable = true;
        self
    }

    pub fn precision(&self) -> u8 {
        self.dtype.precision
    }

    /// Type of the parse target mirroring this parameter across the boundary
    pub fn boundary_type(&self) -> DataType {
        if self.is_callable {
            DataType::host_object()
        } else if self.rank > 0 {
            DataType::host_array_object()
        } else {
            self.dtype
        }
    }

    /// Whether the value arrives as-is, without any host-side conversion
    pub(crate) fn is_host_object(&self) -> bool {
        matches!(
            self.dtype.kind,
            DataKind::HostObject | DataKind::HostArrayObject
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub results: Vec<Parameter>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn result(mut self, result: Parameter) -> Self {
        self.results.push(result);
        self
    }

    /// Parse one signature object or an array of them
    pub fn parse_many(json: &str) -> serde_json::Result<Vec<FunctionSignature>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(FunctionSignature),
            Many(Vec<FunctionSignature>),
        }

        Ok(match serde_json::from_str(json)? {
            OneOrMany::One(sig) => vec![sig],
            OneOrMany::Many(sigs) => sigs,
        })
    }
}
