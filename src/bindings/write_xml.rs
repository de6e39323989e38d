use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use crate::bindings::control_map::ControlMapDoc;

impl ControlMapDoc {
    /// Serialize back into the game's export format.
    pub fn to_xml_string(&self) -> Result<String, String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);
        self.write_events(&mut writer)
            .map_err(|e| format!("serialize control map: {e}"))?;
        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| format!("serialize control map: {e}"))
    }

    /// Write the document to disk. The file handle is scoped to this call;
    /// it is closed on every exit path.
    pub fn write_xml<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 1);
        self.write_events(&mut writer)
            .map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_events<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), quick_xml::Error> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let version = self.version.to_string();
        let options_version = self.options_version.to_string();
        let rebind_version = self.rebind_version.to_string();

        let mut root = BytesStart::new("ActionMaps");
        root.push_attribute(("version", version.as_str()));
        root.push_attribute(("optionsVersion", options_version.as_str()));
        root.push_attribute(("rebindVersion", rebind_version.as_str()));
        root.push_attribute(("profileName", self.profile_name.as_str()));
        writer.write_event(Event::Start(root))?;

        if let Some(header) = &self.header {
            let mut start = BytesStart::new("CustomisationUIHeader");
            start.push_attribute(("label", header.label.as_str()));
            start.push_attribute(("description", header.description.as_str()));
            start.push_attribute(("image", header.image.as_str()));
            writer.write_event(Event::Start(start))?;

            writer.write_event(Event::Start(BytesStart::new("devices")))?;
            for (device_type, instance) in &header.devices {
                let instance = instance.to_string();
                let mut dev = BytesStart::new(device_type.as_str());
                dev.push_attribute(("instance", instance.as_str()));
                writer.write_event(Event::Empty(dev))?;
            }
            writer.write_event(Event::End(BytesEnd::new("devices")))?;

            if !header.categories.is_empty() {
                writer.write_event(Event::Start(BytesStart::new("categories")))?;
                for label in &header.categories {
                    let mut cat = BytesStart::new("category");
                    cat.push_attribute(("label", label.as_str()));
                    writer.write_event(Event::Empty(cat))?;
                }
                writer.write_event(Event::End(BytesEnd::new("categories")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("CustomisationUIHeader")))?;
        }

        for device in &self.device_options {
            let mut start = BytesStart::new("deviceoptions");
            start.push_attribute(("name", device.name.as_str()));
            writer.write_event(Event::Start(start))?;
            for option in &device.options {
                let mut opt = BytesStart::new("option");
                for (key, value) in &option.attributes {
                    opt.push_attribute((key.as_str(), value.as_str()));
                }
                writer.write_event(Event::Empty(opt))?;
            }
            writer.write_event(Event::End(BytesEnd::new("deviceoptions")))?;
        }

        for entry in &self.options {
            let instance = entry.instance.to_string();
            let mut opt = BytesStart::new("options");
            opt.push_attribute(("type", entry.device_type.as_str()));
            opt.push_attribute(("instance", instance.as_str()));
            if let Some(product) = &entry.product {
                opt.push_attribute(("Product", product.as_str()));
            }
            writer.write_event(Event::Empty(opt))?;
        }

        writer.write_event(Event::Empty(BytesStart::new("modifiers")))?;

        for map in self.action_maps.values() {
            let mut am = BytesStart::new("actionmap");
            am.push_attribute(("name", map.name.as_str()));
            writer.write_event(Event::Start(am))?;

            for action in map.actions.values() {
                let mut action_elem = BytesStart::new("action");
                action_elem.push_attribute(("name", action.name.as_str()));
                writer.write_event(Event::Start(action_elem))?;

                for rebind in &action.rebinds {
                    let mut elem = BytesStart::new("rebind");
                    elem.push_attribute(("input", rebind.input.as_str()));
                    if let Some(count) = rebind.multitap {
                        let count = count.to_string();
                        elem.push_attribute(("multiTap", count.as_str()));
                    }
                    writer.write_event(Event::Empty(elem))?;
                }

                writer.write_event(Event::End(BytesEnd::new("action")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("actionmap")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("ActionMaps")))?;
        Ok(())
    }
}
