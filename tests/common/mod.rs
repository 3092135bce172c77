#![allow(dead_code)]

use county_health::config::QueryConfig;
use county_health::ingest::Ingestor;
use county_health::query::QueryService;
use county_health::store::Store;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub const ZIP_COUNTY_CSV: &str = "\
zip,default_state,county,county_state,state_abbreviation,county_code,zip_pop,zip_pop_in_county,n_counties,default_city
02138,MA,Middlesex County,\"Middlesex County, MA\",MA,25017,36314,36314.0,1,Cambridge
01431,MA,Middlesex County,\"Middlesex County, MA\",MA,25017,3055,2958.0,2,Ashby
01431,MA,Worcester County,\"Worcester County, MA\",MA,25027,3055,97.0,2,Ashby
06457,CT,Middlesex County,\"Middlesex County, CT\",CT,09007,46254,46254.0,1,Middletown
";

pub const RANKINGS_CSV: &str = "\
State,County,State_code,County_code,Year_span,Measure_name,Measure_id,Numerator,Denominator,Raw_value,Confidence_Interval_Lower_Bound,Confidence_Interval_Upper_Bound,Data_Release_Year,fipscode
MA,Middlesex County,25,17,2009,Adult obesity,11,193432,1129098,0.1713,0.16,0.18,2012,25017
MA,Middlesex County,25,17,2008,Adult obesity,11,188150,1117539,0.1684,0.158,0.179,2011,25017
MA,Middlesex County,25,17,2008,Unemployment,23,39052,820315,0.0476,,,2010,25017
MA,Worcester County,25,27,2009,Adult obesity,11,137040,600541,0.2282,0.21,0.246,2012,25027
CT,Middlesex County,9,7,2009,Adult obesity,11,31110,130212,0.2389,0.21,0.27,2012,09007
";

pub struct Fixture {
    pub dir: TempDir,
    pub store: Store,
}

impl Fixture {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let store = Store::new(dir.path().join("data.db"), Duration::from_secs(2));
        Ok(Self { dir, store })
    }

    /// Fixture with both join tables loaded.
    pub fn seeded() -> anyhow::Result<Self> {
        let fixture = Self::new()?;
        let zip = fixture.write("zip_county.csv", ZIP_COUNTY_CSV)?;
        let rankings = fixture.write("county_health_rankings.csv", RANKINGS_CSV)?;
        fixture.ingestor().ingest_file(&zip)?;
        fixture.ingestor().ingest_file(&rankings)?;
        Ok(fixture)
    }

    pub fn write(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(self.store.clone())
    }

    pub fn service(&self) -> QueryService {
        QueryService::new(self.store.clone(), QueryConfig::default())
    }
}
