use std::fmt;

use crate::error::{Error, Result};

/// A coordinate reference system identified by its authority id (e.g. `EPSG:4326`),
/// with the PROJ.4 definition used to reach WGS84 lon/lat for ellipsoidal measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crs {
    authid: String,
    proj4: String,
    geographic: bool,
}

impl Crs {
    /// Resolve an `EPSG:<code>` authority id.
    /// Supports the common geographic datums, Web Mercator and the UTM zone families.
    pub fn from_authid(authid: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedCrs(authid.to_string());

        let (authority, code) = authid.split_once(':').ok_or_else(unsupported)?;
        if !authority.eq_ignore_ascii_case("epsg") { return Err(unsupported()) }
        let code: u32 = code.trim().parse().map_err(|_| unsupported())?;

        let (proj4, geographic) = match code {
            4326 => ("+proj=longlat +datum=WGS84 +no_defs +type=crs".to_string(), true),
            4269 => ("+proj=longlat +datum=NAD83 +no_defs +type=crs".to_string(), true),
            4258 | 4937 => ("+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs +type=crs".to_string(), true),
            3857 | 900913 => (
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs +type=crs".to_string(),
                false,
            ),
            32601..=32660 => (format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs +type=crs", code - 32600), false),
            32701..=32760 => (format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs +type=crs", code - 32700), false),
            26901..=26923 => (format!("+proj=utm +zone={} +datum=NAD83 +units=m +no_defs +type=crs", code - 26900), false),
            _ => return Err(unsupported()),
        };

        Ok(Self { authid: format!("EPSG:{code}"), proj4, geographic })
    }

    /// WGS84 lon/lat (`EPSG:4326`).
    pub fn wgs84() -> Self {
        Self {
            authid: "EPSG:4326".into(),
            proj4: "+proj=longlat +datum=WGS84 +no_defs +type=crs".into(),
            geographic: true,
        }
    }

    /// A CRS outside the built-in table, given by its PROJ.4 definition.
    pub fn custom(authid: impl Into<String>, proj4: impl Into<String>) -> Self {
        let proj4 = proj4.into();
        let geographic = proj4.split_whitespace().any(|token| token == "+proj=longlat" || token == "+proj=latlong");
        Self { authid: authid.into(), proj4, geographic }
    }

    #[inline] pub fn authid(&self) -> &str { &self.authid }

    #[inline] pub fn proj4(&self) -> &str { &self.proj4 }

    /// True if coordinates are lon/lat degrees.
    #[inline] pub fn is_geographic(&self) -> bool { self.geographic }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authid)
    }
}
