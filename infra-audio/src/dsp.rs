/// Averages interleaved frames into a single channel.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let channels = usize::from(channels);
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

pub fn resample_linear(samples: &[f32], source_rate_hz: u32, target_rate_hz: u32) -> Vec<f32> {
    if source_rate_hz == target_rate_hz || source_rate_hz == 0 || target_rate_hz == 0 {
        return samples.to_vec();
    }
    if samples.len() <= 1 {
        return samples.to_vec();
    }

    let output_len = ((samples.len() as u64 * u64::from(target_rate_hz))
        / u64::from(source_rate_hz))
    .max(1) as usize;
    if output_len <= 1 {
        return vec![samples[0]];
    }

    let step = f64::from(source_rate_hz) / f64::from(target_rate_hz);
    let last = samples.len() - 1;

    (0..output_len)
        .map(|out_idx| {
            let position = out_idx as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let frac = (position - left as f64) as f32;
            samples[left] * (1.0 - frac) + samples[right] * frac
        })
        .collect()
}
