//! 스캔 호스트 식별
//!
//! 머신 이름과 물리 네트워크 인터페이스의 IP 주소 목록을 수집합니다.
//! 인벤토리 레코드의 `server_name`, `server_ips`로 저장됩니다.

use std::collections::BTreeSet;
use std::net::IpAddr;

use pnet::datalink::{self, NetworkInterface};
use tracing::warn;

use crate::types::HostIdentity;

/// IP 목록 구분자
pub const IP_SEPARATOR: &str = ", ";

impl HostIdentity {
    /// 현재 머신의 호스트 정보를 수집합니다.
    ///
    /// 머신 이름을 얻지 못하면 `COMPUTERNAME`/`HOSTNAME` 환경변수,
    /// 그것도 없으면 `localhost`를 사용합니다.
    pub fn detect() -> Self {
        let name = match sys_info::hostname() {
            Ok(name) if !name.trim().is_empty() => name.trim().to_owned(),
            Ok(_) => fallback_hostname("empty hostname"),
            Err(e) => fallback_hostname(&e.to_string()),
        };

        let ips = join_ips(
            datalink::interfaces()
                .iter()
                .filter(|iface| is_physical(iface))
                .flat_map(|iface| iface.ips.iter().map(|net| net.ip())),
        );

        Self { name, ips }
    }
}

fn fallback_hostname(reason: &str) -> String {
    let name = std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .ok()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_owned());
    warn!(reason, fallback = %name, "failed to read machine name");
    name
}

// 이더넷/무선 인터페이스만 대상으로 함
fn is_physical(iface: &NetworkInterface) -> bool {
    iface.is_up() && !iface.is_loopback() && !iface.is_point_to_point() && iface.mac.is_some()
}

/// 주소를 중복 제거하고 문자열 순서로 정렬하여 `", "`로 연결합니다.
pub fn join_ips(ips: impl IntoIterator<Item = IpAddr>) -> String {
    ips.into_iter()
        .filter(|ip| !ip.is_loopback() && !ip.is_unspecified())
        .map(|ip| ip.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(IP_SEPARATOR)
}
