use core::fmt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameInstallType {
    #[default]
    Live,
    Ptu,
    Eptu,
}

impl GameInstallType {
    pub fn name(&self) -> &'static str {
        match self {
            GameInstallType::Live => "LIVE",
            GameInstallType::Ptu => "PTU",
            GameInstallType::Eptu => "EPTU",
        }
    }

    pub const ALL: [GameInstallType; 3] = [
        GameInstallType::Live,
        GameInstallType::Ptu,
        GameInstallType::Eptu,
    ];

    pub fn iter() -> impl Iterator<Item = GameInstallType> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for GameInstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameInstallType {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(GameInstallType::Live),
            "ptu" => Ok(GameInstallType::Ptu),
            "eptu" => Ok(GameInstallType::Eptu),
            _ => Err("expected one of: live, ptu, eptu"),
        }
    }
}

/// A validated game installation and the control maps it has exported.
#[derive(Debug, Clone)]
pub struct Installation {
    pub path: PathBuf,
    pub channel: GameInstallType,
    pub exported_control_maps: Vec<PathBuf>,
}

/// Look for `<root>/<CHANNEL>` and validate it holds a real install
/// (`Data.p4k` present).
pub fn find_installation(root: &Path, channel: GameInstallType) -> Option<Installation> {
    let path = root.join(channel.name());
    if !path.join("Data.p4k").is_file() {
        return None;
    }
    Some(Installation {
        exported_control_maps: exported_control_maps(&path),
        path,
        channel,
    })
}

/// XML files under `<install>/user/client/0/controls/mappings`, sorted.
pub fn exported_control_maps(install: &Path) -> Vec<PathBuf> {
    let dir = install
        .join("user")
        .join("client")
        .join("0")
        .join("controls")
        .join("mappings");

    let mut maps = Vec::new();
    if let Ok(entries) = fs::read_dir(&dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
            {
                maps.push(path);
            }
        }
    }
    maps.sort();
    maps
}

/// Pure value type for discovered install roots.
pub type InstallPathMap = HashMap<GameInstallType, Option<PathBuf>>;

/// Scan the RSI Launcher log to discover install roots per channel, plus the
/// most recently active channel (if any launch line was seen).
pub fn scan_launcher_log() -> Result<(InstallPathMap, Option<GameInstallType>), String> {
    use directories::BaseDirs;

    let log_file = BaseDirs::new()
        .ok_or("no data dir")?
        .data_dir()
        .join("rsilauncher")
        .join("logs")
        .join("log.log");

    if !log_file.try_exists().unwrap_or(false) {
        return Err(format!("launcher log not found at {}", log_file.display()));
    }
    let content = fs::read_to_string(&log_file).map_err(|e| e.to_string())?;
    Ok(scan_launcher_lines(&content))
}

fn scan_launcher_lines(content: &str) -> (InstallPathMap, Option<GameInstallType>) {
    let launch_line = Regex::new(
        r"(?:\[Launcher::launch\]\s+)?Launching Star Citizen (LIVE|PTU|EPTU) from \((.+)\)",
    )
    .unwrap();

    let mut found: HashMap<GameInstallType, PathBuf> = HashMap::new();
    let mut last_active: Option<GameInstallType> = None;

    for line in content.lines() {
        if let Some(caps) = launch_line.captures(line) {
            let channel = match caps.get(1).map(|m| m.as_str()) {
                Some("LIVE") => GameInstallType::Live,
                Some("PTU") => GameInstallType::Ptu,
                Some("EPTU") => GameInstallType::Eptu,
                _ => continue,
            };
            if let Some(path) = caps.get(2) {
                found.insert(channel, PathBuf::from(path.as_str()));
            }
            last_active = Some(channel);
        }
    }

    let mut out: InstallPathMap = HashMap::new();
    for ty in GameInstallType::ALL {
        out.insert(ty, found.get(&ty).cloned());
    }
    (out, last_active)
}

/// Pick an install root using preference, then last-active, then anything.
pub fn choose_install_root(
    map: &InstallPathMap,
    prefer: GameInstallType,
    last_active: Option<GameInstallType>,
) -> Option<PathBuf> {
    if let Some(Some(p)) = map.get(&prefer) {
        return Some(p.clone());
    }
    if let Some(ty) = last_active {
        if let Some(Some(p)) = map.get(&ty) {
            return Some(p.clone());
        }
    }
    for ty in GameInstallType::ALL {
        if let Some(Some(p)) = map.get(&ty) {
            return Some(p.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_parse_back() {
        for ty in GameInstallType::iter() {
            assert_eq!(ty.name().parse::<GameInstallType>().unwrap(), ty);
        }
        assert!("techpreview".parse::<GameInstallType>().is_err());
    }

    #[test]
    fn launcher_log_scan_finds_roots_and_last_active() {
        let log = "\
[Launcher::launch] Launching Star Citizen LIVE from (F:/StarCitizen/LIVE)\n\
noise line\n\
Launching Star Citizen PTU from (F:/StarCitizen/PTU)\n";

        let (map, last_active) = scan_launcher_lines(log);
        assert_eq!(
            map.get(&GameInstallType::Live).unwrap().as_deref(),
            Some(Path::new("F:/StarCitizen/LIVE"))
        );
        assert_eq!(
            map.get(&GameInstallType::Ptu).unwrap().as_deref(),
            Some(Path::new("F:/StarCitizen/PTU"))
        );
        assert_eq!(map.get(&GameInstallType::Eptu).unwrap(), &None);
        assert_eq!(last_active, Some(GameInstallType::Ptu));
    }

    #[test]
    fn choose_root_prefers_requested_channel() {
        let mut map = InstallPathMap::new();
        map.insert(GameInstallType::Live, Some(PathBuf::from("/live")));
        map.insert(GameInstallType::Ptu, Some(PathBuf::from("/ptu")));
        map.insert(GameInstallType::Eptu, None);

        assert_eq!(
            choose_install_root(&map, GameInstallType::Ptu, None),
            Some(PathBuf::from("/ptu"))
        );
        assert_eq!(
            choose_install_root(&map, GameInstallType::Eptu, Some(GameInstallType::Live)),
            Some(PathBuf::from("/live"))
        );
    }
}
