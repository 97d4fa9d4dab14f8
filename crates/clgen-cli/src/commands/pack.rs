use crate::cli::{PackArgs, UnpackArgs};
use crate::error::Result;
use clgen::core::io::artifact::{dump_object_to_file, load_object_from_file};
use clgen::core::io::binary_file::BinaryFileInput;
use tracing::info;

pub fn run_pack(args: PackArgs) -> Result<()> {
    let input = BinaryFileInput::new(&args.input, args.ext.as_deref())?;
    info!(
        "Packing '{}' ({} bytes) into {:?}",
        input.file_name(),
        input.data().len(),
        &args.output
    );
    dump_object_to_file(&input, &args.output)?;
    println!(
        "Packed {} into artifact: {}",
        input.file_name(),
        args.output.display()
    );
    Ok(())
}

pub fn run_unpack(args: UnpackArgs) -> Result<()> {
    let input: BinaryFileInput = load_object_from_file(&args.artifact)?;
    info!(
        "Unpacking '{}' ({} bytes) to {:?}",
        input.file_name(),
        input.data().len(),
        &args.output
    );
    input.save_as_file(&args.output)?;
    println!(
        "Wrote {} bytes to: {}",
        input.data().len(),
        args.output.display()
    );
    Ok(())
}
