// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::super::paths::{sensitive_root, PathAnalyzer};

#[test]
fn test_extract_paths_strips_quotes() {
    let analyzer = PathAnalyzer::new();

    let paths = analyzer.extract_paths(r#"cp "/etc/hosts" '/tmp/hosts.bak'"#);
    assert_eq!(paths, vec!["/etc/hosts".to_string(), "/tmp/hosts.bak".to_string()]);
}

#[test]
fn test_extract_paths_ignores_relative_and_urls() {
    let analyzer = PathAnalyzer::new();

    let paths = analyzer.extract_paths("curl https://example.com/etc/x -o ./out ~/file");
    assert!(paths.is_empty(), "Found unexpected paths: {:?}", paths);
}

#[test]
fn test_extract_paths_after_option_equals() {
    let analyzer = PathAnalyzer::new();

    let paths = analyzer.extract_paths("tool --config=/etc/tool.conf");
    assert_eq!(paths, vec!["/etc/tool.conf".to_string()]);
}

#[test]
fn test_redirection_targets() {
    let analyzer = PathAnalyzer::new();

    assert_eq!(analyzer.redirection_targets("echo x > /etc/motd"), vec!["/etc/motd"]);
    assert_eq!(analyzer.redirection_targets("echo x >>/var/log/app.log"), vec!["/var/log/app.log"]);
    assert_eq!(analyzer.redirection_targets("make 2> /tmp/err"), vec!["/tmp/err"]);
    assert_eq!(analyzer.redirection_targets("make &> /tmp/all"), vec!["/tmp/all"]);
    assert!(analyzer.redirection_targets("make 2>&1 | tee log").is_empty());
}

#[test]
fn test_sensitive_root_component_boundaries() {
    assert_eq!(sensitive_root("/etc/shadow"), Some("/etc/shadow"));
    assert_eq!(sensitive_root("/etc/ssh/sshd_config"), Some("/etc/ssh"));
    assert_eq!(sensitive_root("/etc/nginx/nginx.conf"), Some("/etc"));
    assert_eq!(sensitive_root("/etc/"), Some("/etc"));
    assert_eq!(sensitive_root("/bin"), Some("/bin"));

    // Prefix without a component boundary is not sensitive
    assert_eq!(sensitive_root("/binaries/tool"), None);
    assert_eq!(sensitive_root("/etcetera"), None);
    assert_eq!(sensitive_root("/home/user/etc"), None);
    assert_eq!(sensitive_root("/"), None);
}

#[test]
fn test_sensitive_root_wildcard_entries() {
    assert_eq!(sensitive_root("/dev/sda"), Some("/dev/sd*"));
    assert_eq!(sensitive_root("/dev/sdb1"), Some("/dev/sd*"));
    assert_eq!(sensitive_root("/dev/nvme0n1p2"), Some("/dev/nvme*"));
    assert_eq!(sensitive_root("/dev/null"), None);
}

#[test]
fn test_analyze_reports_each_path_once() {
    let analyzer = PathAnalyzer::new();

    let findings = analyzer.analyze("tee /etc/hosts > /etc/hosts");
    assert_eq!(findings.len(), 1);
    assert!(findings[0].redirected, "Redirect finding should take precedence");
}

#[test]
fn test_analyze_finding_display() {
    let analyzer = PathAnalyzer::new();

    let findings = analyzer.analyze("ls /boot /tmp");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].to_string(), "sensitive path: /boot");
}
