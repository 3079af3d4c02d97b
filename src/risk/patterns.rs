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

//! Risk rule tables
//!
//! This module contains the ordered pattern tables used by RiskClassifier.
//! Every table is matched case-insensitively; within a table the first
//! matching rule determines the reported explanation.

use regex::Regex;

/// A single classification rule
#[derive(Debug)]
pub struct RiskRule {
    /// Compiled, case-insensitive matcher
    pub regex: Regex,
    /// Short label reported as the matched pattern
    pub label: &'static str,
    /// Human-readable hazard explanation
    pub explanation: &'static str,
}

impl RiskRule {
    pub fn is_match(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }
}

fn build_rules(table: &[(&str, &'static str, &'static str)]) -> Vec<RiskRule> {
    table
        .iter()
        .map(|(pattern, label, explanation)| RiskRule {
            regex: Regex::new(&format!("(?i){}", pattern))
                .expect("risk rule table should contain only valid regex"),
            label,
            explanation,
        })
        .collect()
}

/// Catastrophic commands refused outright
///
/// Each literal matches as a substring only when it ends at the end of
/// the command, whitespace or a shell separator, so `rm -rf /` is caught
/// while `rm -rf /tmp/build` is left to the high-risk table.
pub const BLOCKED_LITERALS: &[&str] = &[
    "rm -rf /",
    "rm -rf /*",
    "rm -rf ~",
    "rm -rf ~/",
    "rm -rf $HOME",
    "rm -rf --no-preserve-root /",
    "mkfs",
    "> /dev/sda",
    "dd if=/dev/zero of=/dev/sda",
    ":(){ :|:& };:",
    "chmod -R 777 /",
    "mv /* /dev/null",
    "> /dev/null/*",
];

/// Builds the blocklist (tier 2): literals plus spelling variants of the same
/// catastrophes (flag permutations, spacing, other disk devices)
pub fn build_blocklist() -> Vec<RiskRule> {
    let mut rules: Vec<RiskRule> = BLOCKED_LITERALS
        .iter()
        .map(|literal| {
            let start = if literal.starts_with(|c: char| c.is_alphanumeric()) {
                r"\b"
            } else {
                ""
            };
            let pattern = format!(r"(?i){}{}(?:$|[\s;&|)])", start, regex::escape(literal));
            RiskRule {
                regex: Regex::new(&pattern)
                    .expect("escaped blocklist literal should be valid regex"),
                label: literal,
                explanation: "Matches a known catastrophic command",
            }
        })
        .collect();

    rules.extend(build_rules(&[
        (
            r"\brm\s+(?:[^\s;&|]+\s+)*?(?:-[a-z]*r[a-z]*|--recursive)\s+(?:[^\s;&|]+\s+)*(?:/\*?|~/?|\$HOME/?)(?:$|[\s;&|)])",
            "rm -r /",
            "Recursive deletion of the root or home directory",
        ),
        (
            r"\bdd\s+.*of=/dev/(?:sd[a-z]|hd[a-z]|vd[a-z]|nvme\d+n\d+)\b",
            "dd to disk device",
            "Direct write to a disk device destroys data and the partition table",
        ),
        (
            r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            "fork bomb",
            "Fork bomb: exponential process spawning",
        ),
    ]));

    rules
}

/// Builds the high-risk table (tier 3): irreversible operations
pub fn build_high_risk_rules() -> Vec<RiskRule> {
    build_rules(&[
        (
            r"\brm\s+(?:-\S+\s+)*(?:-[a-z]*(?:r[a-z]*f|f[a-z]*r)[a-z]*|(?:-[a-z]*r[a-z]*|--recursive)\s+(?:-\S+\s+)*(?:-[a-z]*f[a-z]*|--force)|(?:-[a-z]*f[a-z]*|--force)\s+(?:-\S+\s+)*(?:-[a-z]*r[a-z]*|--recursive))\b",
            "rm -rf",
            "Recursively and forcefully removes files, can wipe critical data",
        ),
        (
            r"\brm\s+-rf\s+--no-preserve-root\b",
            "rm --no-preserve-root",
            "Disables the root-directory safeguard of rm",
        ),
        (
            r"\bdd\b",
            "dd",
            "Direct disk writing utility; misuse destroys data or filesystems",
        ),
        (
            r"\bmkfs\b",
            "mkfs",
            "Formats storage partitions, erasing all existing data",
        ),
        (
            r">\s*/dev/(?:sd[a-z]|nvme\d)",
            "redirect to disk device",
            "Overwrites raw disk blocks",
        ),
        (
            r"\bshred\b\s+.*/dev/(?:sd[a-z]|nvme\d)",
            "shred disk",
            "Securely wipes an entire disk irreversibly",
        ),
        (
            r"\b(?:wipefs|hdparm)\b",
            "low-level disk tool",
            "Low-level disk tool; can erase signatures or corrupt hardware settings",
        ),
        (
            r"\b(?:chown|chmod)\s+-R\s+\S*\s*(?:root|/|/bin|/etc|/boot|/usr)(?:$|[\s/])",
            "recursive permission change on system path",
            "Recursively altering core permissions may break the OS",
        ),
        (
            r"\bmv\s+/\S*\s+/dev/null\b",
            "mv to /dev/null",
            "Discards system directories permanently",
        ),
        (
            r":\(\)\s*\{",
            "fork bomb",
            "Function definition shaped like a fork bomb",
        ),
        (
            r"\bln\s+-sf\s+.*\s+/etc/",
            "ln -sf into /etc",
            "Overwrites system symlinks",
        ),
        (
            r">\s*/etc/(?:passwd|shadow|group|gshadow|sudoers)\b",
            "overwrite auth file",
            "Overwriting authentication files locks users out",
        ),
        (
            r"\b(?:grub-install|lilo|efibootmgr)\b",
            "bootloader rewrite",
            "Modifying the bootloader improperly renders the system unbootable",
        ),
        (
            r"\bmount\s+.*-o\s+loop\b.*\b/dev/sd[a-z]\b",
            "loop mount over disk",
            "Mounting onto raw devices is unsafe",
        ),
        (
            r"\byes\s+\|\s*rm\b",
            "yes | rm",
            "Forces destructive confirmation without prompting",
        ),
    ])
}

/// Builds the privilege-elevation matchers (tier 4)
pub fn build_privilege_rules() -> Vec<RiskRule> {
    build_rules(&[
        (
            r"\bsudo\b",
            "sudo",
            "Executing commands with root privileges can have system-wide effects",
        ),
        (
            r"(?:^|[\s;&|(])(?:su|doas|pkexec)\b",
            "privilege switch",
            "Switches to another (usually root) user",
        ),
    ])
}

/// Builds the medium-risk table (tier 5): state-changing operations
pub fn build_medium_risk_rules() -> Vec<RiskRule> {
    build_rules(&[
        // System and service control
        (
            r"\b(?:shutdown|reboot|halt|poweroff)\b|\binit\s+[06]\b",
            "power control",
            "May shut down or reboot the system",
        ),
        (
            r"\b(?:kill|pkill|killall)\b",
            "process termination",
            "Terminates running processes, possibly critical ones",
        ),
        (
            r"\b(?:systemctl|service)\s+(?:\S+\s+)?(?:stop|disable|mask)\b",
            "service stop",
            "Disables services, affecting system behaviour",
        ),
        (
            r"\bsystemctl\s+restart\s+(?:ssh|sshd|network|NetworkManager|firewalld|iptables|systemd-logind)\b",
            "essential service restart",
            "Restarts essential services",
        ),
        (r"\bsysctl\s+-w\b", "sysctl -w", "Modifies kernel parameters at runtime"),
        (
            r"\b(?:modprobe|insmod|rmmod)\b",
            "kernel module",
            "Modifies kernel modules and drivers",
        ),
        (
            r"\b(?:dpkg-reconfigure|update-alternatives)\b",
            "package reconfiguration",
            "Alters package configuration globally",
        ),
        (
            r"\bjournalctl\s+--vacuum-",
            "journal vacuum",
            "Deletes log history",
        ),
        // Package and script management
        (
            r"\b(?:apt|apt-get|dpkg|yum|dnf|zypper|pacman|apk|emerge|nix-env|brew|pip|pip3|npm|snap|flatpak)\s+(?:\S+\s+)*?(?:install|remove|purge|update|upgrade|-S\w*|-R\w*|-i)\b",
            "package management",
            "Package manager operations change installed software",
        ),
        (
            r"\b(?:wget|curl)\s+.*\|\s*(?:sudo\s+)?(?:sh|bash|zsh)\b",
            "pipe to shell",
            "Pipes downloaded content directly into a shell",
        ),
        (
            r"\b(?:tee|cat)\s+.*\|\s*sponge\s+/etc/",
            "sponge into /etc",
            "Overwrites system files silently",
        ),
        (
            r"\btar\s+.*--overwrite\b",
            "tar --overwrite",
            "Unpacks while overwriting existing files",
        ),
        // Network and identity
        (
            r"\b(?:iptables|ip6tables|nft|ufw|firewall-cmd)\b",
            "firewall change",
            "Modifies firewall behaviour, could block access",
        ),
        (
            r"\bifconfig\s+\S+\s+down\b|\bip\s+link\s+set\s+\S+\s+down\b",
            "interface down",
            "Brings down a network interface",
        ),
        (
            r"\b(?:hostnamectl|hostname|domainname)\s+\S",
            "hostname change",
            "Changes the network identity of the host",
        ),
        // Users and filesystem
        (
            r"\b(?:fdisk|parted|gdisk|cfdisk|sfdisk)\b",
            "partitioning",
            "Modifies disk partitions",
        ),
        (
            r"\b(?:useradd|userdel|usermod|groupadd|groupdel|groupmod|deluser|adduser|chage)\b",
            "user management",
            "Changes users and access control",
        ),
        (
            r"\b(?:mount|umount)\b",
            "mount",
            "Alters filesystem mount state",
        ),
        (
            r"\bchmod\s+(?:-\w+\s+)*777\s+/",
            "chmod 777 on absolute path",
            "Grants everyone full access to a system path",
        ),
        (
            r"\b(?:chown|chmod|chgrp|setfacl|chattr)\b",
            "permission change",
            "Modifies file permissions or attributes",
        ),
        (
            r"\b(?:cat|less|more|tail|head|bat)\s+.*(?:\.ssh|passwd|shadow|sudoers)\b",
            "read security file",
            "Prints sensitive security configuration",
        ),
        (r"\bpasswd\b", "passwd", "Touches user passwords"),
        (
            r"\bcrontab\b",
            "crontab",
            "Schedules jobs that run periodically",
        ),
        (
            r"\.(?:bashrc|profile|zshrc|bash_profile|zprofile)\b",
            "shell startup file",
            "Modifying shell startup files can break login",
        ),
        (
            r">>?\s*/etc/",
            "redirect into /etc",
            "Writes into system configuration",
        ),
        // File operations
        (
            r"\brm\s+-[^f\s]*r",
            "rm -r",
            "Recursive deletion; risky if the path is wrong",
        ),
        (
            r"\bfind\s+.*\s-delete\b",
            "find -delete",
            "Find with -delete is irreversible",
        ),
        (
            r"\brsync\s+.*--delete",
            "rsync --delete",
            "Deletes destination files not present in the source",
        ),
        (
            r"\bcp\s+-rf\s+/\s",
            "copy root",
            "Copies the entire root filesystem",
        ),
    ])
}

/// Builds the information-leak table (tier 7)
pub fn build_info_leak_rules() -> Vec<RiskRule> {
    build_rules(&[
        (
            r"\becho\s+.*\$\{?\w*(?:TOKEN|KEY|PASS|SECRET)",
            "echo secret variable",
            "May print tokens or secrets to the screen",
        ),
        (
            r"\bcat\s+.*history\b",
            "shell history",
            "May expose recent terminal usage, including secrets",
        ),
        (
            r"\bhistory\b",
            "history",
            "Prints recent terminal usage, possibly including secrets",
        ),
        (
            r"\b(?:cat|less|more|bat)\s+(?:\S*/)?\.env\b",
            ".env file",
            "May reveal environment configuration secrets",
        ),
        (
            r"(?:^|[;&|]\s*)env\s*(?:$|[;&|>])",
            "env",
            "Lists all environment variables, which may contain secrets",
        ),
        (
            r"\bprintenv\b",
            "printenv",
            "Prints environment variables, which may contain secrets",
        ),
        (
            r"\bps\s+\S*ww",
            "ps auxww",
            "Shows full command lines, which may include credentials",
        ),
        (
            r#"\bgrep\s+(?:-\w+\s+)*['"]?(?:token|key|secret|password)['"]?\s"#,
            "grep for secrets",
            "Searches files for secrets",
        ),
        (
            r"(?:^|[;&|]\s*)(?:set|export\s+-p|declare\s+-p)\s*(?:$|[;&|>])",
            "shell variables",
            "Dumps shell variables",
        ),
    ])
}

/// Characters that make a command recognisable; a command with none is malformed
pub fn has_command_characters(command: &str) -> bool {
    command
        .chars()
        .any(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '_' | '-'))
}
