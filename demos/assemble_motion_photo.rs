// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

// ------------------------------------------------------------

// This application takes a still image path and a movie path from
// the command line and assembles a Motion Photo from them, writing
// the result alongside the still image with a `.motion` suffix
// inserted before the extension.

use std::env;
use std::path::Path;

use motionphoto::AssembleOptions;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let (image, movie) = match args.len() {
        3 => (&args[1], &args[2]),
        _ => {
            eprintln!("usage: assemble_motion_photo <image.heic> <movie.mov>");
            std::process::exit(1);
        }
    };

    let image_path = Path::new(image);
    let output = image_path.with_extension("motion.heic");

    motionphoto::assemble(image_path, Path::new(movie), &output, &AssembleOptions::default())?;
    println!("wrote {}", output.display());
    Ok(())
}
