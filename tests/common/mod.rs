#![allow(dead_code)]

use intrusion_detector::config::MlConfig;
use intrusion_detector::ml::ModelManager;
use std::path::PathBuf;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

pub fn fixture_config() -> MlConfig {
    MlConfig {
        autoencoder_path: fixture("scae_model.json"),
        encoder_path: fixture("encoder_model.json"),
        classifier_path: fixture("model.json"),
    }
}

pub fn load_fixture_models() -> ModelManager {
    ModelManager::load(&fixture_config()).expect("fixture artifacts load")
}

/// The documented normal-traffic example.
pub const NORMAL_FORM: &str = "protocol_type=1&service=2&flag=3&logged_in=1&count=5\
&same_srv_rate=1.0&diff_srv_rate=0.0&dst_host_srv_count=10\
&dst_host_same_srv_rate=1.0&dst_host_same_src_port_rate=0.0";

/// High connection count, all to different services.
pub const INTRUSION_FORM: &str = "protocol_type=1&service=2&flag=3&logged_in=0&count=100\
&same_srv_rate=0.0&diff_srv_rate=1.0&dst_host_srv_count=10\
&dst_host_same_srv_rate=0.1&dst_host_same_src_port_rate=0.0";
