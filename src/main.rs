use std::process::ExitCode;

fn main() -> ExitCode {
  form_localizer_lib::run()
}
