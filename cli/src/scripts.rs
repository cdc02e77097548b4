//! Shell integration scripts printed by `cmdscribe init`.
//!
//! Each script binds three key combinations in the user's shell:
//!
//! - Ctrl+G — complete the current line (`cmdscribe suggest`)
//! - Ctrl+P — generate a command from the line as a prompt
//!   (`cmdscribe generate`)
//! - Ctrl+E — explain the current line (`cmdscribe explain`)
//!
//! The scripts assume `cmdscribe` is on `PATH`; users who install
//! elsewhere can edit the emitted snippet before sourcing it.

use cmdscribe_core::ShellName;

const BASH_SCRIPT: &str = r#"# --- cmdscribe integration ---

# Replace the current readline buffer with a suggested completion.
_cmdscribe_suggest() {
    local COMPLETED_COMMAND
    COMPLETED_COMMAND=$(cmdscribe suggest "$READLINE_LINE")
    if [ -n "$COMPLETED_COMMAND" ]; then
        READLINE_LINE="$COMPLETED_COMMAND"
        READLINE_POINT=${#COMPLETED_COMMAND}
    fi
}

# Treat the current buffer as a natural-language prompt and replace it
# with a generated command.
_cmdscribe_generate() {
    local COMPLETED_COMMAND
    COMPLETED_COMMAND=$(cmdscribe generate "$READLINE_LINE")
    if [ -n "$COMPLETED_COMMAND" ]; then
        READLINE_LINE="$COMPLETED_COMMAND"
        READLINE_POINT=${#COMPLETED_COMMAND}
    fi
}

# Print a one-line explanation of the current buffer below the prompt.
_cmdscribe_explain() {
    cmdscribe explain "$READLINE_LINE"
}

bind -x '"\C-g": _cmdscribe_suggest'
bind -x '"\C-p": _cmdscribe_generate'
bind -x '"\C-e": _cmdscribe_explain'

# --- end cmdscribe integration ---
"#;

const ZSH_SCRIPT: &str = r#"# --- cmdscribe integration ---

_cmdscribe_suggest() {
    local completed
    completed=$(cmdscribe suggest "$BUFFER")
    if [ -n "$completed" ]; then
        BUFFER="$completed"
        CURSOR=${#BUFFER}
    fi
    zle redisplay
}

_cmdscribe_generate() {
    local completed
    completed=$(cmdscribe generate "$BUFFER")
    if [ -n "$completed" ]; then
        BUFFER="$completed"
        CURSOR=${#BUFFER}
    fi
    zle redisplay
}

_cmdscribe_explain() {
    zle -I
    cmdscribe explain "$BUFFER"
}

zle -N _cmdscribe_suggest
zle -N _cmdscribe_generate
zle -N _cmdscribe_explain
bindkey '^G' _cmdscribe_suggest
bindkey '^P' _cmdscribe_generate
bindkey '^E' _cmdscribe_explain

# --- end cmdscribe integration ---
"#;

const SH_SCRIPT: &str = r#"# --- cmdscribe integration ---

# Plain sh has no programmable key bindings; call the assistant
# directly instead:
#
#   cmdscribe suggest 'tar -x'
#   cmdscribe generate 'extract a tarball into /tmp'
#   cmdscribe explain 'tar -xzf archive.tar.gz'

# --- end cmdscribe integration ---
"#;

/// Returns the integration script for a shell.
pub fn integration_script(shell: ShellName) -> &'static str {
    match shell {
        ShellName::Bash => BASH_SCRIPT,
        ShellName::Zsh => ZSH_SCRIPT,
        ShellName::Sh => SH_SCRIPT,
    }
}
