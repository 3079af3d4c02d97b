use crate::core::{OsContext, PackageManager, ShellFlavor};
use crate::plan::prompt::build_system_prompt;

#[test]
fn test_prompt_embeds_host_context() {
    let os = OsContext {
        id: "arch".to_string(),
        name: "Arch Linux".to_string(),
        package_manager: PackageManager::Pacman,
        shell: ShellFlavor::Zsh,
    };

    let prompt = build_system_prompt(&os);
    assert!(prompt.contains("The user is running: Arch Linux."));
    assert!(prompt.contains("The OS ID is: arch."));
    assert!(prompt.contains("The package manager is: pacman."));
    assert!(prompt.contains("The user's shell is: zsh."));
}

#[test]
fn test_prompt_states_response_contract() {
    let prompt = build_system_prompt(&OsContext::default());

    assert!(prompt.contains(r#"{"commands": ["ps aux"]}"#));
    assert!(prompt.contains(r#""reason""#));
}

#[test]
fn test_prompt_shell_guidance_differs() {
    let mut os = OsContext::default();
    let bash = build_system_prompt(&os);
    os.shell = ShellFlavor::Fish;
    let fish = build_system_prompt(&os);

    assert_ne!(bash, fish);
    assert!(fish.contains("set VAR value"));
}
