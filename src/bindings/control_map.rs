use indexmap::IndexMap;
use roxmltree::{Document, Node};
use std::fmt;

/// Structured form of an exported control-map document (`<ActionMaps>`).
///
/// Only action/rebind entries are ever rewritten; device options, the
/// customisation header and unrelated attributes are carried through so the
/// written file stays faithful to the game's export.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMapDoc {
    pub version: u32,
    pub options_version: u32,
    pub rebind_version: u32,
    pub profile_name: String,
    pub header: Option<UiHeader>,
    pub device_options: Vec<DeviceOptions>,
    pub options: Vec<DeviceEntry>,
    pub action_maps: IndexMap<String, DocActionMap>,
}

/// `<CustomisationUIHeader>` passthrough.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiHeader {
    pub label: String,
    pub description: String,
    pub image: String,
    /// (device tag, instance) pairs from the `<devices>` block.
    pub devices: Vec<(String, u32)>,
    pub categories: Vec<String>,
}

/// `<deviceoptions name="...">` block: per-device axis settings (deadzone,
/// invert, ...). Attributes are kept verbatim and never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOptions {
    pub name: String,
    pub options: Vec<DeviceOptionEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOptionEntry {
    pub attributes: Vec<(String, String)>,
}

/// `<options type="joystick" instance="2" Product="..."/>` — the connected
/// device roster; the source of the instance-side table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceEntry {
    pub device_type: String,
    pub instance: u32,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocActionMap {
    pub name: String,
    pub actions: IndexMap<String, DocAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocAction {
    pub name: String,
    pub rebinds: Vec<DocRebind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocRebind {
    pub input: String,
    pub multitap: Option<u32>,
}

#[derive(Debug)]
pub enum DocParseError {
    Xml(roxmltree::Error),
    /// Root element is not `<ActionMaps>`.
    MissingRoot,
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

impl fmt::Display for DocParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocParseError::Xml(e) => write!(f, "invalid XML: {e}"),
            DocParseError::MissingRoot => write!(f, "document root is not <ActionMaps>"),
            DocParseError::MissingAttribute { element, attribute } => {
                write!(f, "<{element}> is missing the '{attribute}' attribute")
            }
        }
    }
}

impl std::error::Error for DocParseError {}

impl From<roxmltree::Error> for DocParseError {
    fn from(e: roxmltree::Error) -> Self {
        DocParseError::Xml(e)
    }
}

impl ControlMapDoc {
    /// Parse an exported document. Handles both shapes the game produces:
    /// attributes directly on `<ActionMaps>`, or nested under an
    /// `<ActionProfiles>` wrapper.
    pub fn parse(content: &str) -> Result<Self, DocParseError> {
        let doc = Document::parse(content)?;
        let root = doc.root_element();
        if !root.has_tag_name("ActionMaps") {
            return Err(DocParseError::MissingRoot);
        }

        let profile = root
            .children()
            .find(|n| n.has_tag_name("ActionProfiles"))
            .unwrap_or(root);

        let uint_attr = |key: &str, default: u32| {
            profile
                .attribute(key)
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(default)
        };

        let mut out = ControlMapDoc {
            version: uint_attr("version", 1),
            options_version: uint_attr("optionsVersion", 2),
            rebind_version: uint_attr("rebindVersion", 2),
            profile_name: profile.attribute("profileName").unwrap_or("default").to_string(),
            header: None,
            device_options: Vec::new(),
            options: Vec::new(),
            action_maps: IndexMap::new(),
        };

        for node in profile.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "CustomisationUIHeader" => out.header = Some(Self::parse_header(node)),
                "deviceoptions" => out.device_options.push(Self::parse_device_options(node)?),
                "options" => out.options.push(Self::parse_device_entry(node)?),
                "actionmap" => {
                    let map = Self::parse_action_map(node)?;
                    out.action_maps.insert(map.name.clone(), map);
                }
                // <modifiers/> and anything unknown carry no rebind content.
                _ => {}
            }
        }

        Ok(out)
    }

    fn parse_header(node: Node) -> UiHeader {
        let mut header = UiHeader {
            label: node.attribute("label").unwrap_or_default().to_string(),
            description: node.attribute("description").unwrap_or_default().to_string(),
            image: node.attribute("image").unwrap_or_default().to_string(),
            ..UiHeader::default()
        };

        for devices in node.children().filter(|n| n.has_tag_name("devices")) {
            for dev in devices.children().filter(|n| n.is_element()) {
                let instance = dev
                    .attribute("instance")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(1);
                header.devices.push((dev.tag_name().name().to_string(), instance));
            }
        }
        for categories in node.children().filter(|n| n.has_tag_name("categories")) {
            for cat in categories.children().filter(|n| n.has_tag_name("category")) {
                if let Some(label) = cat.attribute("label") {
                    header.categories.push(label.to_string());
                }
            }
        }
        header
    }

    fn parse_device_options(node: Node) -> Result<DeviceOptions, DocParseError> {
        let name = node
            .attribute("name")
            .ok_or(DocParseError::MissingAttribute {
                element: "deviceoptions",
                attribute: "name",
            })?
            .to_string();

        let options = node
            .children()
            .filter(|n| n.has_tag_name("option"))
            .map(|opt| DeviceOptionEntry {
                attributes: opt
                    .attributes()
                    .map(|a| (a.name().to_string(), a.value().to_string()))
                    .collect(),
            })
            .collect();

        Ok(DeviceOptions { name, options })
    }

    fn parse_device_entry(node: Node) -> Result<DeviceEntry, DocParseError> {
        Ok(DeviceEntry {
            device_type: node
                .attribute("type")
                .ok_or(DocParseError::MissingAttribute {
                    element: "options",
                    attribute: "type",
                })?
                .to_string(),
            instance: node
                .attribute("instance")
                .and_then(|v| v.parse::<u32>().ok())
                .ok_or(DocParseError::MissingAttribute {
                    element: "options",
                    attribute: "instance",
                })?,
            product: node.attribute("Product").map(str::to_string),
        })
    }

    fn parse_action_map(node: Node) -> Result<DocActionMap, DocParseError> {
        let name = node
            .attribute("name")
            .ok_or(DocParseError::MissingAttribute {
                element: "actionmap",
                attribute: "name",
            })?
            .to_string();

        let mut actions = IndexMap::new();
        for action_node in node.children().filter(|n| n.has_tag_name("action")) {
            let action_name = action_node
                .attribute("name")
                .ok_or(DocParseError::MissingAttribute {
                    element: "action",
                    attribute: "name",
                })?
                .to_string();

            let rebinds = action_node
                .children()
                .filter(|n| n.has_tag_name("rebind"))
                .map(|rebind| DocRebind {
                    input: rebind.attribute("input").unwrap_or_default().trim().to_string(),
                    multitap: rebind
                        .attribute("multiTap")
                        .and_then(|v| v.parse::<u32>().ok()),
                })
                .collect();

            actions.insert(
                action_name.clone(),
                DocAction {
                    name: action_name,
                    rebinds,
                },
            );
        }

        Ok(DocActionMap { name, actions })
    }

    /// All rebind input strings in document order; handy for passthrough
    /// assertions and diagnostics.
    pub fn rebind_inputs(&self) -> impl Iterator<Item = &str> {
        self.action_maps
            .values()
            .flat_map(|m| m.actions.values())
            .flat_map(|a| a.rebinds.iter())
            .map(|r| r.input.as_str())
    }
}
